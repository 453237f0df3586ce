//! Integration tests for raster image loading.
//!
//! Fixtures are generated on the fly into a temp directory so no binary
//! assets need to be checked in.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use faceprint_adapters::FsImageSource;
use faceprint_core::{ImageInfo, ImageSource};
use image::{Rgb, RgbImage};

fn write_fixture(path: &Path) {
    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 32) as u8, (y * 32) as u8, 128]));
    img.save(path).expect("write fixture");
}

#[test]
fn test_load_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("face.png");
    write_fixture(&path);

    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);

    let info = images.into_iter().next().unwrap().expect("should load PNG");
    assert_eq!(info.width, 8);
    assert_eq!(info.height, 8);
    assert!(info.path.ends_with("face.png"));
}

#[test]
fn test_load_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("face.jpg");
    write_fixture(&path);

    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);

    let info = images
        .into_iter()
        .next()
        .unwrap()
        .expect("should load JPEG");
    assert_eq!(info.width, 8);
    assert_eq!(info.height, 8);
}

#[test]
fn test_load_bmp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("face.bmp");
    write_fixture(&path);

    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);
    assert!(images.into_iter().next().unwrap().is_ok());
}

#[test]
fn test_load_directory_skips_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("a.png"));
    write_fixture(&dir.path().join("b.jpg"));
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 2);

    for result in images {
        let info: ImageInfo = result.expect("all fixtures should load");
        assert_eq!(info.width, 8);
        assert_eq!(info.height, 8);
    }
}

#[test]
fn test_recursive_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    write_fixture(&dir.path().join("top.png"));
    write_fixture(&nested.join("deep.png"));

    let flat = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(flat.count_hint(), Some(1));

    let recursive = FsImageSource::new(vec![dir.path().to_path_buf()], true);
    assert_eq!(recursive.count_hint(), Some(2));
}

#[test]
fn test_corrupt_file_yields_item_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);
    assert!(images.into_iter().next().unwrap().is_err());
}

#[test]
fn test_nonexistent_path_yields_nothing() {
    let source = FsImageSource::new(vec!["/nonexistent/dir".into()], false);
    assert_eq!(source.count_hint(), Some(0));
    assert_eq!(source.images().count(), 0);
}
