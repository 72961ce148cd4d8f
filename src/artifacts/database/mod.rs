pub mod database_entry;
