pub mod stac_writer;

pub use stac_writer::StacWriter;
