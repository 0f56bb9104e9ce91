pub mod blob_store;
pub mod azure_blob;
pub mod local_blob;
pub mod memory_blob;
