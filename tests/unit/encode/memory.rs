use super::*;
use crate::foundation::core::{Bitrate, Canvas, FrameRate};
use std::sync::{Arc, Mutex};

fn cfg() -> EncoderConfig {
    EncoderConfig::new(
        Canvas::new(2, 2),
        FrameRate::new(12).unwrap(),
        Bitrate::from_mbps(5).unwrap(),
    )
}

fn view(data: &[u8]) -> FrameView<'_> {
    FrameView {
        width: 2,
        height: 2,
        data,
    }
}

#[test]
fn encoder_emits_one_chunk_per_frame_synchronously() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut enc = InMemoryEncoder::new();
    enc.configure(
        &cfg(),
        Box::new(move |chunk| {
            sink.lock().unwrap().push(chunk);
            Ok(())
        }),
    )
    .unwrap();

    let fps = FrameRate::new(12).unwrap();
    let pixels = [7u8; 16];
    for i in 0..3 {
        enc.encode(view(&pixels), FrameDescriptor::new(FrameIndex(i), fps))
            .unwrap();
        assert_eq!(enc.queue_depth(), 0);
    }
    enc.flush().unwrap();
    enc.close();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].keyframe);
    assert_eq!(seen[1].timestamp_us, 83_333);
    assert_eq!(seen[2].data, pixels.to_vec());
}

#[test]
fn encoder_rejects_out_of_order_and_unconfigured_use() {
    let fps = FrameRate::new(12).unwrap();
    let pixels = [0u8; 16];

    let mut enc = InMemoryEncoder::new();
    assert!(
        enc.encode(view(&pixels), FrameDescriptor::new(FrameIndex(0), fps))
            .is_err()
    );

    enc.configure(&cfg(), Box::new(|_| Ok(()))).unwrap();
    enc.encode(view(&pixels), FrameDescriptor::new(FrameIndex(5), fps))
        .unwrap();
    assert!(
        enc.encode(view(&pixels), FrameDescriptor::new(FrameIndex(5), fps))
            .is_err()
    );
}

#[test]
fn muxer_container_reads_back_in_order() {
    let mut mux: Box<dyn ContainerMuxer> = Box::new(InMemoryMuxer::new());
    for (i, ts) in [0u64, 500_000, 1_000_000].into_iter().enumerate() {
        mux.add_chunk(EncodedChunk {
            data: vec![i as u8; i + 1],
            index: FrameIndex(i as u64),
            timestamp_us: ts,
            keyframe: i == 0,
        })
        .unwrap();
    }
    assert_eq!(mux.chunk_count(), 3);

    let bytes = mux.finalize().unwrap();
    let chunks = InMemoryMuxer::parse(&bytes).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].timestamp_us, 500_000);
    assert_eq!(chunks[2].data, vec![2, 2, 2]);
    assert!(chunks[0].keyframe && !chunks[1].keyframe);

    assert!(InMemoryMuxer::parse(&bytes[..bytes.len() - 1]).is_err());
    assert!(InMemoryMuxer::parse(b"nope").is_err());
}
