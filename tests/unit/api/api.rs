use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use super::*;
use crate::config::GeneratorConfig;
use crate::encode::assembler::AssetFormat;
use crate::simulate::phase::PhaseFrames;

fn pipeline_in(name: &str) -> (Pipeline, PathBuf) {
    let root = PathBuf::from("target").join("unit_api").join(name);
    let _ = std::fs::remove_dir_all(&root);
    let mut cfg = GeneratorConfig {
        sample_step: 3,
        phase_frames: PhaseFrames {
            explosion: 2,
            floating: 2,
            return_home: 2,
            finalize: 2,
        },
        ..GeneratorConfig::default()
    }
    .with_seed(3);
    cfg.paths.upload_dir = root.join("uploads");
    cfg.paths.output_dir = root.join("out");
    (Pipeline::native(cfg).unwrap(), root)
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn request(millis: u64) -> GenerationRequest {
    GenerationRequest::new(AssetFormat::Gif).at(UNIX_EPOCH + Duration::from_millis(millis))
}

fn dir_is_empty_or_missing(p: &Path) -> bool {
    std::fs::read_dir(p).map_or(true, |mut d| d.next().is_none())
}

#[test]
fn status_payload() {
    let r = handle_status();
    assert_eq!(r.status, 200);
    assert_eq!(
        r.body,
        json!({"message": "Particle Animation Generator API", "status": "ready"})
    );
}

#[test]
fn successful_upload_returns_public_url() {
    let (pipeline, _root) = pipeline_in("success");
    let rec = UploadRecord::new("p.png", "image/png", png(6, 6));

    let r = handle_upload(&pipeline, Some(rec), &request(77));
    assert!(r.is_success());
    assert_eq!(r.body["success"], json!(true));
    assert_eq!(r.body["animationUrl"], json!("/animations/animation_77.gif"));
    assert_eq!(r.body["message"], json!(SUCCESS_MESSAGE));
}

#[test]
fn missing_file_is_400() {
    let (pipeline, root) = pipeline_in("missing");
    let r = handle_upload(&pipeline, None, &request(1));
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "No image file provided"}));
    assert!(dir_is_empty_or_missing(&root.join("uploads")));
}

#[test]
fn non_image_is_400_and_nothing_is_written() {
    let (pipeline, root) = pipeline_in("non_image");
    let rec = UploadRecord::new("a.pdf", "application/pdf", vec![0; 16]);
    let r = handle_upload(&pipeline, Some(rec), &request(1));
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "File must be an image"}));
    assert!(dir_is_empty_or_missing(&root.join("uploads")));
}

#[test]
fn oversized_upload_is_400() {
    let (pipeline, root) = pipeline_in("oversized");
    let rec = UploadRecord::new(
        "big.png",
        "image/png",
        vec![0; (crate::upload::DEFAULT_MAX_UPLOAD_BYTES + 1) as usize],
    );
    let r = handle_upload(&pipeline, Some(rec), &request(1));
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "File size must be less than 10MB"}));
    assert!(dir_is_empty_or_missing(&root.join("uploads")));
}

#[test]
fn undecodable_image_is_500_with_generic_message() {
    let (pipeline, root) = pipeline_in("undecodable");
    let rec = UploadRecord::new("broken.png", "image/png", b"not really a png".to_vec());
    let r = handle_upload(&pipeline, Some(rec), &request(5));
    assert_eq!(r.status, 500);
    assert_eq!(r.body, json!({"error": GENERATION_FAILED}));
    // The upload itself was accepted and kept.
    assert!(root.join("uploads").join("upload_5_broken.png").is_file());
}
