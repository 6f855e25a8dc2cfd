//! Hard link example
//!
//! Demonstrates aliasing: two paths, one node. Writes through either path
//! are visible through the other, and the bytes survive until the last path
//! is removed.
//! Run with: cargo run --example hard_links

use memfs::{FileSystem, InMemoryFs};
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let fs = InMemoryFs::new();

    fs.write_file(Path::new("/docs/report.txt"), b"draft", 0o644)
        .await?;
    fs.link(Path::new("/docs/report.txt"), Path::new("/latest"))
        .await?;

    fs.write_file(Path::new("/latest"), b"final", 0o644).await?;
    let content = fs.read_file(Path::new("/docs/report.txt")).await?;
    println!("report.txt after writing through /latest: {}", String::from_utf8_lossy(&content));

    fs.rename(Path::new("/docs"), Path::new("/archive")).await?;
    println!("after moving /docs to /archive:");
    for entry in fs.read_dir(Path::new("/")).await? {
        println!("  /{} ({:?}, {} bytes)", entry.name, entry.file_type, entry.size);
    }

    fs.remove(Path::new("/archive/report.txt")).await?;
    let content = fs.read_file(Path::new("/latest")).await?;
    println!("/latest after removing the original: {}", String::from_utf8_lossy(&content));

    let usage = fs.usage();
    println!(
        "usage: {} bytes in {} files, {} directories",
        usage.total_bytes, usage.file_count, usage.dir_count
    );

    Ok(())
}
