use aleph_dsp::modules::{Drums, DrumsParam, Echo, EchoParam, DRUMS_PARAMS};
use aleph_dsp::{
    AudioBuffer, BufferTap, BufferTapN, Context, Engine, Fix16, FrameIo, Fract32, Module,
    OnePoleFr32, ParamTable, ParamValue, TapIndex, NUM_CHANNELS,
};
use assert_approx_eq::assert_approx_eq;

fn impulse() -> [Fract32; NUM_CHANNELS] {
    let mut frame = [Fract32::ZERO; NUM_CHANNELS];
    frame[0] = Fract32::lit("0.5");
    frame
}

#[test]
fn tap_returns_to_start_after_one_loop() {
    let mut storage = [Fract32::ZERO; 1000];
    let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
    let mut tap = BufferTap::new(&buf);
    tap.set_pos_frames(TapIndex::from_num(123));
    let start = tap.position();
    for _ in 0..1000 {
        tap.next();
    }
    assert_eq!(tap.position(), start);
}

#[test]
fn divided_tap_holds_for_three_frames() {
    let mut storage = [Fract32::ZERO; 100];
    let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
    let mut tap = BufferTapN::new(&buf);
    tap.set_div(4);
    tap.set_inc(1);
    for _ in 0..3 {
        tap.next();
    }
    assert_eq!(tap.position(), 0);
    tap.next();
    assert_eq!(tap.position(), 1);
}

#[test]
fn one_pole_settles_on_unit_target() {
    let mut filt = OnePoleFr32::new(&Context::new_480());
    filt.set_hz(Fix16::from_num(500));
    filt.set_target(Fract32::MAX);
    let mut steps = 0;
    while !filt.is_settled() {
        filt.next();
        steps += 1;
        assert!(steps < 100_000);
    }
    assert_eq!(filt.current(), filt.target());
    assert_eq!(filt.next(), Fract32::MAX);
}

#[test]
fn echo_repeats_an_impulse() {
    let ctx = Context::new_480();
    let mut storage = [Fract32::ZERO; 4800];
    let mut echo = Echo::new(&ctx, &mut storage);
    echo.set(EchoParam::TimeSlew, Fix16::ZERO);
    // 1/64 s is exactly 750 frames
    echo.set(EchoParam::Time, Fix16::lit("0.015625"));
    echo.set(EchoParam::Mix, Fix16::lit("0.5"));
    echo.set(EchoParam::Feedback, Fix16::lit("0.5"));
    let mut out = Vec::new();
    out.push(echo.next(&impulse())[0]);
    for _ in 1..1600 {
        out.push(echo.next(&[Fract32::ZERO; NUM_CHANNELS])[0]);
    }
    assert_approx_eq!(out[0].to_num::<f64>(), 0.25, 1e-6);
    assert_approx_eq!(out[750].to_num::<f64>(), 0.25, 1e-6);
    assert_approx_eq!(out[1500].to_num::<f64>(), 0.125, 1e-6);
    let loud = out.iter().filter(|x| **x != Fract32::ZERO).count();
    assert_eq!(loud, 3);
}

#[test]
fn echo_crush_head_holds_samples() {
    let ctx = Context::new_480();
    let mut storage = [Fract32::ZERO; 4800];
    let mut echo = Echo::new(&ctx, &mut storage);
    echo.set(EchoParam::TimeSlew, Fix16::ZERO);
    echo.set(EchoParam::Time, Fix16::lit("0.015625"));
    echo.set(EchoParam::Mix, Fix16::ZERO);
    echo.set(EchoParam::Feedback, Fix16::ZERO);
    echo.set(EchoParam::CrushAmp, Fix16::lit("0.5"));
    echo.set(EchoParam::CrushDiv, 4);
    // the divided head lands on slot 2 after 750 frames and holds it
    let mut out = Vec::new();
    for i in 0..800 {
        let input = if i == 2 {
            impulse()
        } else {
            [Fract32::ZERO; NUM_CHANNELS]
        };
        out.push(echo.next(&input)[0]);
    }
    let echoed: Vec<usize> = (3..800).filter(|i| out[*i] != Fract32::ZERO).collect();
    assert_eq!(echoed, vec![752, 753, 754, 755]);
    assert_approx_eq!(out[2].to_num::<f64>(), 0.5, 1e-6);
    assert_approx_eq!(out[753].to_num::<f64>(), 0.25, 1e-6);
}

#[test]
fn drums_through_block_adapter() {
    let ctx = Context::new_480();
    let table = ParamTable::new(DRUMS_PARAMS.len());
    let mut engine = Engine::new(Drums::new(&ctx), &table);
    let input = vec![0.0f32; NUM_CHANNELS * 256];
    let mut output = vec![0.0f32; NUM_CHANNELS * 256];
    assert_eq!(engine.process_block(&input, &mut output, 256), 256);
    assert!(output.iter().all(|x| *x == 0.0));

    table.set(DrumsParam::Gate as u32, ParamValue::Int(1));
    table.set(DrumsParam::AtkDur as u32, ParamValue::Fix(Fix16::ZERO));
    let mut heard = false;
    for _ in 0..8 {
        engine.process_block(&input, &mut output, 256);
        for frame in output.chunks_exact(NUM_CHANNELS) {
            assert!(frame.iter().all(|x| *x == frame[0]));
            assert!(frame[0].abs() <= 1.0);
            heard |= frame[0] != 0.0;
        }
    }
    assert!(heard);

    table.set_enabled(false);
    engine.process_block(&input, &mut output, 256);
    assert!(output.iter().all(|x| *x == 0.0));
}

#[test]
fn drums_input_routing_through_frame_adapter() {
    let ctx = Context::new_480();
    let table = ParamTable::new(DRUMS_PARAMS.len());
    let mut drums = Drums::new(&ctx);
    drums.set(DrumsParam::NoiseAmp, Fix16::ZERO);
    drums.set(DrumsParam::AtkDur, Fix16::ZERO);
    drums.set(DrumsParam::Gate, 1);
    let mut engine = Engine::new(drums, &table);
    table.set(DrumsParam::InAmp1 as u32, Fix16::lit("0.5").into());

    // wait for the noise gain to glide out and the input gain to glide in
    let mut io = FrameIo::default();
    for _ in 0..48000 {
        engine.process_frame(&mut io);
    }
    assert_eq!(engine.module().input_gain(1), Some(Fract32::lit("0.5")));

    // a signal on input 0 is not routed anywhere
    io.input = [Fract32::ZERO; NUM_CHANNELS];
    io.input[0] = Fract32::lit("0.5");
    for _ in 0..4800 {
        engine.process_frame(&mut io);
        assert!(io.output[0].saturating_abs() < Fract32::lit("0.0001"));
    }
    // while input 1 is
    io.input = [Fract32::ZERO; NUM_CHANNELS];
    io.input[1] = Fract32::lit("0.5");
    let mut peak = Fract32::ZERO;
    for _ in 0..4800 {
        engine.process_frame(&mut io);
        peak = peak.max(io.output[0].saturating_abs());
    }
    assert!(peak > Fract32::lit("0.01"));
}

#[test]
fn parameters_written_from_another_thread() {
    let ctx = Context::new_480();
    let table = ParamTable::new(DRUMS_PARAMS.len());
    let mut engine = Engine::new(Drums::new(&ctx), &table);
    let input = vec![0.0f32; NUM_CHANNELS * 64];
    let mut output = vec![0.0f32; NUM_CHANNELS * 64];
    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..1000 {
                let hz = Fix16::from_num(100 + i);
                table.set(DrumsParam::SvfHz as u32, hz.into());
                table.set(DrumsParam::Gate as u32, ParamValue::Int(i % 2));
            }
            table.set(DrumsParam::Gate as u32, ParamValue::Int(1));
        });
    });
    engine.process_block(&input, &mut output, 64);
    assert!(engine.module().envelope().gate());
    assert!(!table.has_pending());
    assert_eq!(engine.module().num_params() as usize, DRUMS_PARAMS.len());
}
