pub mod batch;
pub mod metadata_assembler;

pub use batch::{BatchProcessor, BatchReport};
pub use metadata_assembler::{
    create_collection, CollectionOptions, ItemOptions, MetadataAssembler,
};
