//! Resource limits example
//!
//! Demonstrates limits on file size, file count and path shape.
//! Run with: cargo run --example resource_limits

use memfs::{FileSystem, FsLimits, InMemoryFs};
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let limits = FsLimits::new()
        .max_file_size(16)
        .max_file_count(2)
        .max_path_depth(3);
    let fs = InMemoryFs::with_limits(limits);

    println!("=== File Size Limit ===\n");
    match fs
        .write_file(Path::new("/big"), &[0u8; 32], 0o644)
        .await
    {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Blocked as expected: {}", e),
    }

    println!("\n=== File Count Limit ===\n");
    fs.write_file(Path::new("/a"), b"a", 0o644).await?;
    // Links count as files.
    fs.link(Path::new("/a"), Path::new("/b")).await?;
    match fs.write_file(Path::new("/c"), b"c", 0o644).await {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Blocked as expected: {}", e),
    }

    println!("\n=== Path Depth Limit ===\n");
    match fs.mkdir_all(Path::new("/one/two/three/four"), 0o755).await {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Blocked as expected: {}", e),
    }

    Ok(())
}
