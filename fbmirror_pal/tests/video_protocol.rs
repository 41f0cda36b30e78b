use cgmath::vec2;
use fbmirror_pal::{
    blit::{Layer, Plane, Surface, SurfaceMemory},
    ge2d::{self, Command, Rectangle},
    prelude::*,
    testing::{DecoderRequest, Journal, RecordingEngine, ScriptedDecoder, ScriptedFrame},
    BlitRequest, FrameSource, OsdCanvas, PixelFormat,
};
use fitgeom::Rect;

mod common;

fn frame_1080p() -> ScriptedFrame {
    ScriptedFrame {
        canvas: 0x0000_2726,
        format: PixelFormat::NV21,
        size: vec2(1920, 1080),
    }
}

fn source_with(
    journal: &Journal,
    script: &[Option<ScriptedFrame>],
) -> FrameSource<ScriptedDecoder> {
    let mut decoder = ScriptedDecoder::new(journal.clone());
    for &entry in script {
        decoder.push(entry);
    }
    FrameSource::new(decoder)
}

#[test]
fn acquire_then_release() {
    common::try_init_logger_for_default_harness();

    let journal = Journal::new();
    let mut source = source_with(&journal, &[Some(frame_1080p()), Some(frame_1080p())]);

    for _ in 0..2 {
        let frame = source.try_acquire().unwrap().expect("a frame is ready");
        assert!(source.is_holding());
        assert!(source.decoder().is_holding());

        assert_eq!(frame.canvas(), 0x2726);
        assert_eq!(frame.format(), PixelFormat::NV21);
        assert_eq!(frame.size(), vec2(1920, 1080));

        source.release(frame).unwrap();
        assert!(!source.is_holding());
        assert!(!source.decoder().is_holding());
    }

    use DecoderRequest::*;
    let expected = [
        GetCurrentFrame,
        Canvas0Addr,
        Ge2dFormat,
        FrameSize,
        PutCurrentFrame,
    ];
    let requests = journal.decoder_requests();
    assert_eq!(requests.len(), expected.len() * 2);
    assert_eq!(requests[..5], expected);
    assert_eq!(requests[5..], expected);
}

#[test]
fn not_ready_needs_no_release() {
    common::try_init_logger_for_default_harness();

    let journal = Journal::new();
    let mut source = source_with(&journal, &[None, Some(frame_1080p())]);

    assert!(source.try_acquire().unwrap().is_none());
    assert!(!source.is_holding());

    // The next tick may acquire right away
    let frame = source.try_acquire().unwrap().unwrap();
    source.release(frame).unwrap();

    // An exhausted script is "not ready" as well
    assert!(source.try_acquire().unwrap().is_none());

    assert_eq!(
        journal.decoder_requests(),
        [
            DecoderRequest::GetCurrentFrame,
            DecoderRequest::GetCurrentFrame,
            DecoderRequest::Canvas0Addr,
            DecoderRequest::Ge2dFormat,
            DecoderRequest::FrameSize,
            DecoderRequest::PutCurrentFrame,
            DecoderRequest::GetCurrentFrame,
        ]
    );
}

#[test]
#[should_panic(expected = "hasn't been released")]
fn double_acquire_panics() {
    let journal = Journal::new();
    let mut source = source_with(&journal, &[Some(frame_1080p())]);

    let _frame = source.try_acquire().unwrap().unwrap();
    let _ = source.try_acquire();
}

#[test]
fn metadata_failure_is_reported() {
    common::try_init_logger_for_default_harness();

    let journal = Journal::new();
    let mut source = source_with(&journal, &[Some(frame_1080p())]);
    let mut decoder_failing = ScriptedDecoder::new(journal.clone());
    decoder_failing.push(Some(frame_1080p()));
    decoder_failing.fail_on(DecoderRequest::Ge2dFormat);
    let mut failing = FrameSource::new(decoder_failing);

    let err = failing.try_acquire().unwrap_err();
    assert_eq!(err.request, "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_GE2D_FORMAT");
    assert!(failing.is_holding());
    assert!(err.to_string().contains("GET_GE2D_FORMAT"));

    // The well-behaved source is unaffected
    let frame = source.try_acquire().unwrap().unwrap();
    source.release(frame).unwrap();
}

#[test]
fn empty_frame_is_rejected() {
    let journal = Journal::new();
    let mut source = source_with(
        &journal,
        &[Some(ScriptedFrame {
            size: vec2(0, 720),
            ..frame_1080p()
        })],
    );

    let err = source.try_acquire().unwrap_err();
    assert_eq!(err.request, "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_SIZE");
}

#[test]
fn frame_surface_is_canvas_addressed() {
    let journal = Journal::new();
    let mut source = source_with(&journal, &[Some(frame_1080p())]);

    let frame = source.try_acquire().unwrap().unwrap();
    assert!((frame.aspect() - 16.0 / 9.0).abs() < 1e-9);

    let surface = frame.surface();
    assert_eq!(surface.memory, SurfaceMemory::Canvas(0x2726));
    // Geometry only; the canvases locate the memory
    assert_eq!(
        surface.planes[..],
        [
            Plane {
                addr: 0,
                width: 1920,
                height: 1080,
            },
            Plane {
                addr: 0,
                width: 1920,
                height: 540,
            },
        ]
    );

    let journal_engine = Journal::new();
    let mut engine = RecordingEngine::new(journal_engine.clone());
    engine
        .blit(&BlitRequest::Copy {
            src: Layer::whole(surface),
            dst: Layer::new(
                Surface::single_plane(
                    SurfaceMemory::Scratch,
                    PixelFormat::RGB565,
                    0x5000_0000,
                    vec2(1920, 1080),
                ),
                Rect::new(0, 0, 1920, 1080),
            ),
        })
        .unwrap();
    let blit = journal_engine.blits()[0];
    assert_eq!(blit.config.src_para.mem_type, ge2d::CANVAS_TYPE_INVALID);
    assert_eq!(blit.config.src_para.canvas_index, 0x2726);
    assert_eq!(blit.command, Command::BlitNoAlpha);

    source.release(frame).unwrap();
}

/// 1920×1080 ARGB8888 primary display, 480×320 RGB565 secondary display,
/// aspect derived from the primary display
#[test]
fn osd_mirroring_descriptors() {
    common::try_init_logger_for_default_harness();

    let primary_size = vec2(1920, 1080);
    let secondary_size = vec2(480, 320);
    let primary_format = PixelFormat::from_bits_per_pixel(32).unwrap();
    assert_eq!(primary_format, PixelFormat::ARGB8888);

    let aspect = fitgeom::aspect_of(primary_size);
    let osd_rect = fitgeom::fit_rect(
        secondary_size,
        fitgeom::aspect_of(secondary_size),
        aspect,
    );
    assert_eq!(osd_rect, Rect::new(0, 25, 480, 270));

    let journal = Journal::new();
    let mut engine = RecordingEngine::new(journal.clone());

    let lcd = Surface::single_plane(
        SurfaceMemory::External,
        PixelFormat::RGB565,
        0x3f00_0000,
        secondary_size,
    );
    engine
        .blit(&BlitRequest::Copy {
            src: Layer::whole(Surface::osd(OsdCanvas::Osd0, primary_format, primary_size)),
            dst: Layer::new(lcd, osd_rect),
        })
        .unwrap();

    let blits = journal.blits();
    assert_eq!(blits.len(), 1);
    assert_eq!(blits[0].command, Command::StretchBlitNoAlpha);
    assert_eq!(blits[0].config.src_para.mem_type, ge2d::CANVAS_OSD0);
    assert_eq!(
        blits[0].para.dst_rect,
        Rectangle {
            x: 0,
            y: 25,
            w: 480,
            h: 270
        }
    );
}
