pub mod doc_table;
pub mod doclinks;
pub mod layout;
