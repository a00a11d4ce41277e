use super::*;
use crate::foundation::core::{Canvas, Fps};

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_gif");
    std::fs::create_dir_all(&dir).unwrap();
    let p = dir.join(name);
    let _ = std::fs::remove_file(&p);
    p
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: rgba.repeat((w * h) as usize),
        premultiplied: false,
    }
}

#[test]
fn writes_multi_frame_looping_gif() {
    let out = scratch("three.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&out));
    sink.begin(SinkConfig {
        width: 4,
        height: 4,
        fps: Fps::default(),
    })
    .unwrap();
    for (i, c) in [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]
        .into_iter()
        .enumerate()
    {
        sink.push_frame(FrameIndex(i as u64), &solid(4, 4, c)).unwrap();
    }
    assert_eq!(sink.frames_written(), 3);
    sink.end().unwrap();

    use image::AnimationDecoder as _;
    let file = std::io::BufReader::new(File::open(&out).unwrap());
    let decoder = image::codecs::gif::GifDecoder::new(file).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 3);
    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(num / den, 70);
}

#[test]
fn rejects_bad_config_and_unstarted_use() {
    let out = scratch("bad.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&out));
    let f = FrameRGBA::blank(Canvas {
        width: 2,
        height: 2,
    });
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    assert!(sink.end().is_err());
    assert!(
        sink.begin(SinkConfig {
            width: 0,
            height: 2,
            fps: Fps::default(),
        })
        .is_err()
    );
}

#[test]
fn refuses_to_overwrite_when_asked() {
    let out = scratch("keep.gif");
    std::fs::write(&out, b"x").unwrap();
    let mut opts = GifSinkOpts::new(&out);
    opts.overwrite = false;
    let mut sink = GifSink::new(opts);
    let err = sink
        .begin(SinkConfig {
            width: 2,
            height: 2,
            fps: Fps::default(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn huge_frame_duration_does_not_overflow() {
    let out = scratch("slow.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&out));
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(1, 5_000_000).unwrap(),
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &solid(2, 2, [9, 9, 9, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.frames_written(), 1);
    assert!(out.exists());
}
