use crate::error::Result;
use crate::models::{Collection, Item, Link};
use crate::utils::constants::MEDIA_TYPE_JSON;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Saves and loads STAC documents as pretty-printed JSON.
pub struct StacWriter;

impl StacWriter {
    /// Write `collection` to `path`, pointing its `self` link at the absolute destination.
    pub fn write_collection(collection: &mut Collection, path: &Path) -> Result<PathBuf> {
        let href = absolute(path)?;
        set_self_link(&mut collection.links, &href);
        Self::write_json(collection, &href)?;
        Ok(href)
    }

    /// Write `item` to `path`, pointing its `self` link at the absolute destination.
    pub fn write_item(item: &mut Item, path: &Path) -> Result<PathBuf> {
        let href = absolute(path)?;
        set_self_link(&mut item.links, &href);
        Self::write_json(item, &href)?;
        Ok(href)
    }

    pub fn read_collection(path: &Path) -> Result<Collection> {
        let reader = BufReader::new(File::open(path)?);
        let mut collection: Collection = serde_json::from_reader(reader)?;

        if !collection.links.iter().any(|l| l.rel == "self") {
            let href = absolute(path)?;
            set_self_link(&mut collection.links, &href);
        }
        Ok(collection)
    }

    pub fn read_item(path: &Path) -> Result<Item> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_json<T: Serialize>(document: &T, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!("wrote {}", path.display());
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn set_self_link(links: &mut Vec<Link>, href: &Path) {
    links.retain(|l| l.rel != "self");
    links.push(Link::new("self", href.to_string_lossy()).with_media_type(MEDIA_TYPE_JSON));
}
