pub mod changelog;
pub mod ledger_entry;

pub use changelog::{AlterTable, ChangeOperation, Changelog, Column, CreateTable};
pub use ledger_entry::LedgerEntry;
