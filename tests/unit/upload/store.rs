use std::time::Duration;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_upload").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn saves_under_timestamped_name_and_creates_dir() {
    let dir = scratch_dir("timestamped");
    let rec = UploadRecord::new("my painting.png", "image/png", vec![1, 2, 3]);
    let now = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);

    let saved = save_upload(&rec, &dir, now).unwrap();
    assert_eq!(
        saved.path.file_name().unwrap().to_str().unwrap(),
        "upload_1700000000123_my_painting.png"
    );
    assert_eq!(std::fs::read(&saved.path).unwrap(), vec![1, 2, 3]);
    assert_eq!(saved.byte_len, 3);
    assert_eq!(saved.media_type, "image/png");
}

#[test]
fn same_millisecond_uploads_get_distinct_names() {
    let dir = scratch_dir("collisions");
    let rec = UploadRecord::new("a.png", "image/png", vec![9]);
    let now = UNIX_EPOCH + Duration::from_millis(42);

    let a = save_upload(&rec, &dir, now).unwrap();
    let b = save_upload(&rec, &dir, now).unwrap();
    assert_ne!(a.path, b.path);
    assert_eq!(
        b.path.file_name().unwrap().to_str().unwrap(),
        "upload_42_1_a.png"
    );
}

#[test]
fn existing_directory_is_not_an_error() {
    let dir = scratch_dir("existing");
    std::fs::create_dir_all(&dir).unwrap();
    let rec = UploadRecord::new("x.jpg", "image/jpeg", vec![0]);
    save_upload(&rec, &dir, UNIX_EPOCH).unwrap();
}

#[test]
fn sanitize_strips_directories_and_odd_chars() {
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\fakepath\\photo 1.jpg"), "photo_1.jpg");
    assert_eq!(sanitize_file_name(".hidden"), "hidden");
    assert_eq!(sanitize_file_name(""), "image");
    assert_eq!(sanitize_file_name("dir/"), "image");
}
