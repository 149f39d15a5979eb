//! End-to-end tests for the distribution engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gifpar_compute::{
    Accelerator, Capabilities, ComputeError, ComputeResult, DistributionEngine, ExecutionFlags, FramePipeline,
    LocalTransport, Scheduler, SliceMessage, ThreadTransport, Transport, WorkAssignment,
};
use gifpar_core::{FlattenedBuffer, Frame, FrameGeometry, FrameSequence, Rgb};
use gifpar_ops::BlurParams;

fn sequence(n: usize, width: u32, height: u32) -> FrameSequence {
    let frames = (0..n)
        .map(|f| {
            let pixels = (0..(width * height) as usize)
                .map(|i| {
                    let v = ((i * 31 + f * 97) % 256) as u8;
                    Rgb::new(v, v.wrapping_mul(3), 255 - v)
                })
                .collect();
            Frame::new(width, height, pixels).unwrap()
        })
        .collect();
    FrameSequence::new(frames).unwrap()
}

fn params() -> BlurParams {
    BlurParams::new(2, 10)
}

fn distributed() -> ExecutionFlags {
    ExecutionFlags { distributed: true, ..Default::default() }
}

/// Reference result: every frame processed on the coordinator.
fn reference(seq: &FrameSequence) -> Vec<i32> {
    let mut buf = FlattenedBuffer::from_sequence(seq).unwrap();
    let pipeline = FramePipeline::cpu(params());
    let engine = DistributionEngine::new(pipeline.clone());
    engine.run(&mut buf, ExecutionFlags::SEQUENTIAL, &mut LocalTransport::new(1, pipeline)).unwrap();
    buf.into_samples()
}

#[test]
fn test_local_transport_matches_reference() {
    let seq = sequence(7, 24, 40);
    let expected = reference(&seq);

    for world_size in [2, 3, 4, 8, 12] {
        let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
        let pipeline = FramePipeline::cpu(params());
        let engine = DistributionEngine::new(pipeline.clone());
        let mut t = LocalTransport::new(world_size, pipeline);
        let summary = engine.run(&mut buf, distributed(), &mut t).unwrap();

        assert_eq!(summary.exchanges, (world_size - 1).min(7), "world {}", world_size);
        assert_eq!(buf.samples(), &expected[..], "world {}", world_size);
    }
}

#[test]
fn test_thread_transport_matches_reference() {
    let seq = sequence(9, 30, 30);
    let expected = reference(&seq);

    for world_size in [2, 4, 5] {
        let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
        let pipeline = FramePipeline::cpu(params()).with_threaded(true);
        let geometry: Arc<[FrameGeometry]> = buf.geometry().into();
        let mut t = ThreadTransport::spawn(world_size, geometry, pipeline.clone()).unwrap();

        let engine = DistributionEngine::new(pipeline);
        let flags = ExecutionFlags { distributed: true, threaded: true, accelerated: false };
        let summary = engine.run(&mut buf, flags, &mut t).unwrap();
        t.shutdown().unwrap();

        assert_eq!(summary.exchanges, world_size - 1);
        assert_eq!(buf.samples(), &expected[..], "world {}", world_size);
    }
}

#[test]
fn test_threaded_local_matches_reference() {
    let seq = sequence(6, 20, 50);
    let expected = reference(&seq);

    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let pipeline = FramePipeline::cpu(params()).with_threaded(true);
    let engine = DistributionEngine::new(pipeline.clone());
    let flags = ExecutionFlags { threaded: true, ..Default::default() };
    engine.run(&mut buf, flags, &mut LocalTransport::new(1, pipeline)).unwrap();
    assert_eq!(buf.samples(), &expected[..]);
}

#[test]
fn test_more_ranks_than_frames() {
    // Two frames over five workers: ranks 3..5 never exchange.
    let seq = sequence(2, 16, 16);
    let expected = reference(&seq);

    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let pipeline = FramePipeline::cpu(params());
    let mut t = ThreadTransport::spawn(6, buf.geometry().into(), pipeline.clone()).unwrap();
    let summary = DistributionEngine::new(pipeline).run(&mut buf, distributed(), &mut t).unwrap();
    t.shutdown().unwrap();

    assert_eq!(summary.exchanges, 2);
    assert_eq!(buf.samples(), &expected[..]);
}

#[test]
fn test_exchange_sizes_are_symmetric() {
    struct Recording {
        inner: LocalTransport,
        sizes: Vec<(usize, usize)>,
    }

    impl Transport for Recording {
        fn world_size(&self) -> usize {
            self.inner.world_size()
        }
        fn exchange(&mut self, msg: SliceMessage) -> ComputeResult<SliceMessage> {
            let sent = msg.samples.len();
            let reply = self.inner.exchange(msg)?;
            self.sizes.push((sent, reply.samples.len()));
            Ok(reply)
        }
    }

    let frames = vec![
        Frame::filled(10, 10, 50).unwrap(),
        Frame::filled(6, 20, 50).unwrap(),
        Frame::filled(13, 3, 50).unwrap(),
        Frame::filled(10, 10, 50).unwrap(),
        Frame::filled(4, 4, 50).unwrap(),
    ];
    let seq = FrameSequence::new(frames).unwrap();
    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let pipeline = FramePipeline::cpu(params());
    let mut t = Recording { inner: LocalTransport::new(3, pipeline.clone()), sizes: Vec::new() };
    DistributionEngine::new(pipeline).run(&mut buf, distributed(), &mut t).unwrap();

    // Rank 1: frames 0..3 = 100 + 120 + 39, rank 2: frames 3..5 = 100 + 16.
    assert_eq!(t.sizes, vec![(259, 259), (116, 116)]);
}

#[test]
fn test_short_reply_is_rejected() {
    struct Truncating;

    impl Transport for Truncating {
        fn world_size(&self) -> usize {
            3
        }
        fn exchange(&mut self, mut msg: SliceMessage) -> ComputeResult<SliceMessage> {
            msg.samples.truncate(msg.samples.len() - 1);
            Ok(msg)
        }
    }

    let seq = sequence(4, 8, 8);
    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let before = buf.clone();
    let engine = DistributionEngine::new(FramePipeline::cpu(params()));

    let err = engine.run(&mut buf, distributed(), &mut Truncating).unwrap_err();
    assert!(matches!(err, ComputeError::ExchangeSizeMismatch { rank: 1, expected: 128, actual: 127 }));
    assert_eq!(buf, before);
}

/// Device that runs the CPU kernels and counts frames.
#[derive(Default)]
struct MockDevice {
    frames: AtomicUsize,
}

impl Accelerator for MockDevice {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn blur(&self, frame: &mut [i32], radius: usize, threshold: i32, width: usize, height: usize) -> ComputeResult<()> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        gifpar_ops::blur::blur(frame, width, height, &BlurParams::new(radius, threshold))?;
        Ok(())
    }

    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()> {
        gifpar_ops::sobel::sobel(frame, width, height)?;
        Ok(())
    }
}

#[test]
fn test_accelerated_run_uses_device() {
    let seq = sequence(8, 20, 20);
    let expected = reference(&seq);
    let device = Arc::new(MockDevice::default());

    let caps = Capabilities::detect(device.as_ref());
    let flags = Scheduler::auto().resolve(distributed(), seq.len(), &caps);
    assert_eq!(flags, ExecutionFlags { distributed: true, threaded: true, accelerated: true });

    let pipeline = FramePipeline::from_flags(flags, device.clone(), &caps, params()).unwrap();
    assert_eq!(pipeline.backend_name(), "accelerator");

    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let mut t = ThreadTransport::spawn(3, buf.geometry().into(), pipeline.clone()).unwrap();
    DistributionEngine::new(pipeline).run(&mut buf, flags, &mut t).unwrap();
    t.shutdown().unwrap();

    assert_eq!(device.frames.load(Ordering::SeqCst), 8);
    assert_eq!(buf.samples(), &expected[..]);
}

/// Device that reports itself available on the first query only.
#[derive(Default)]
struct FadingDevice {
    queries: AtomicUsize,
}

impl Accelerator for FadingDevice {
    fn name(&self) -> &'static str {
        "fading"
    }

    fn is_available(&self) -> bool {
        self.queries.fetch_add(1, Ordering::SeqCst) == 0
    }

    fn blur(&self, frame: &mut [i32], radius: usize, threshold: i32, width: usize, height: usize) -> ComputeResult<()> {
        gifpar_ops::blur::blur(frame, width, height, &BlurParams::new(radius, threshold))?;
        Ok(())
    }

    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()> {
        gifpar_ops::sobel::sobel(frame, width, height)?;
        Ok(())
    }
}

#[test]
fn test_availability_queried_once_per_run() {
    let seq = sequence(8, 12, 12);
    let expected = reference(&seq);
    let device = Arc::new(FadingDevice::default());

    let caps = Capabilities::detect(device.as_ref());
    let flags = Scheduler::auto().resolve(ExecutionFlags::default(), seq.len(), &caps);
    assert!(flags.accelerated);

    let pipeline = FramePipeline::from_flags(flags, device.clone(), &caps, params()).unwrap();
    assert_eq!(pipeline.backend_name(), "accelerator");

    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let mut t = LocalTransport::new(1, pipeline.clone());
    DistributionEngine::new(pipeline).run(&mut buf, flags, &mut t).unwrap();

    assert_eq!(device.queries.load(Ordering::SeqCst), 1);
    assert_eq!(buf.samples(), &expected[..]);
}

#[test]
fn test_scheduler_scenarios() {
    let device = MockDevice::default();
    let with = Capabilities::detect(&device);
    let without = Capabilities::default();
    let s = Scheduler::auto();

    assert_eq!(s.resolve(ExecutionFlags::default(), 3, &with), ExecutionFlags::SEQUENTIAL);
    assert_eq!(
        s.resolve(ExecutionFlags::default(), 5, &without),
        ExecutionFlags { distributed: false, threaded: true, accelerated: false }
    );
    assert_eq!(
        s.resolve(ExecutionFlags::default(), 5, &with),
        ExecutionFlags { distributed: false, threaded: true, accelerated: true }
    );
}

#[test]
fn test_invalid_world_rejected_before_exchange() {
    let seq = sequence(3, 8, 8);
    let mut buf = FlattenedBuffer::from_sequence(&seq).unwrap();
    let pipeline = FramePipeline::cpu(params());
    let mut t = LocalTransport::new(0, pipeline.clone());
    let err = DistributionEngine::new(pipeline).run(&mut buf, distributed(), &mut t).unwrap_err();
    assert!(matches!(err, ComputeError::InvalidPartition(_)));
    assert!(WorkAssignment::new(3, 0).is_err());
}
