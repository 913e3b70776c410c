//! End-to-end walk through the voice agent building blocks: configuration,
//! VAD segmentation, the speech-server adapters, and the session registry.
//!
//! Usage: cargo run --example voice_agent_flow
//!
//! Point SPEECH_SERVER_URL at a live speech server to exercise the HTTP
//! adapters; without one those steps print the transport error and the
//! demo carries on.

use voicebridge::audio::frame::AudioFrame;
use voicebridge::audio::vad::energy::EnergyVAD;
use voicebridge::audio::vad::{VoiceActivityEvent, VoiceActivityKind};
use voicebridge::config::SpeechConfig;
use voicebridge::services::{RecognitionService, SynthesisService};
use voicebridge::session::{SessionRecord, SessionRegistry};

const SAMPLE_RATE: u32 = 16000;

/// 20 ms of a 440 Hz tone at the given amplitude.
fn tone_frame(amplitude: f64, phase: &mut f64) -> AudioFrame {
    let samples = SAMPLE_RATE / 50;
    let mut data = Vec::with_capacity(samples as usize * 2);
    for _ in 0..samples {
        let sample = (amplitude * phase.sin()) as i16;
        data.extend_from_slice(&sample.to_le_bytes());
        *phase += 2.0 * std::f64::consts::PI * 440.0 / f64::from(SAMPLE_RATE);
    }
    AudioFrame::new(data, SAMPLE_RATE, 1)
}

/// A short synthetic exchange: silence, one loud utterance, silence.
fn synthetic_utterance() -> Vec<AudioFrame> {
    let mut phase = 0.0;
    let mut frames = Vec::new();
    for _ in 0..15 {
        frames.push(tone_frame(0.0, &mut phase)); // 300 ms lead-in
    }
    for _ in 0..30 {
        frames.push(tone_frame(3000.0, &mut phase)); // 600 ms of "speech"
    }
    for _ in 0..30 {
        frames.push(tone_frame(0.0, &mut phase)); // 600 ms tail silence
    }
    frames
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    println!("=== Voice Agent Flow ===\n");

    // Step 1: Configuration
    let config = SpeechConfig::from_env();
    println!("1. Configuration loaded:\n   {config:?}\n");

    // Step 2: User joins a room
    let registry = SessionRegistry::new();
    registry
        .register(SessionRecord::new("demo-room", "demo-user", "Demo User"))
        .await;
    println!("2. Session registered ({} active)\n", registry.active_count().await);

    // Step 3: Greeting, at most once per interval
    let tts = config.tts_client();
    if registry
        .should_greet("demo-user", SessionRegistry::DEFAULT_GREETING_INTERVAL)
        .await
    {
        println!("3. Greeting the user...");
        match tts.synthesize("Hello! How can I help you today?").await {
            Ok(result) => {
                let path = "/tmp/voicebridge_greeting.bin";
                std::fs::write(path, &result.audio).unwrap();
                println!(
                    "   Got {} bytes of {} audio, written to {path}",
                    result.audio.len(),
                    result.mime_type
                );
                registry.record_greeting("demo-user").await;
            }
            Err(e) => println!("   Synthesis unavailable: {e}"),
        }
    } else {
        println!("3. User was greeted recently, staying quiet");
    }
    println!();

    // Step 4: The user speaks; the VAD segments the stream
    println!("4. Running the VAD over a synthetic utterance...");
    let mut vad = EnergyVAD::new(config.vad_params());
    let mut end_event: Option<VoiceActivityEvent> = None;
    for frame in &synthetic_utterance() {
        if let Some(event) = vad.process_frame(frame) {
            match event.kind {
                VoiceActivityKind::StartOfSpeech => {
                    println!("   Speech started at sample {}", event.samples_index);
                }
                VoiceActivityKind::EndOfSpeech => {
                    println!(
                        "   Speech ended: {:.2}s of speech, {} frames captured",
                        event.speech_duration,
                        event.frames.len()
                    );
                    end_event = Some(event);
                }
            }
        }
    }
    if let Some(event) = vad.flush() {
        end_event = Some(event);
    }
    println!();

    // Step 5: Transcribe the captured segment
    match end_event {
        Some(event) => {
            println!("5. Transcribing the captured segment...");
            let stt = config.stt_client();
            match stt.recognize(&event.frames, None).await {
                Ok(result) => {
                    let transcript = if result.transcript.is_empty() {
                        "(nothing recognized)".to_string()
                    } else {
                        result.transcript
                    };
                    println!(
                        "   Transcript ({}): {transcript}",
                        if result.language_code.is_empty() {
                            "unknown language"
                        } else {
                            &result.language_code
                        }
                    );
                }
                Err(e) => println!("   Recognition unavailable: {e}"),
            }
        }
        None => println!("5. No speech segment captured"),
    }
    println!();

    // Step 6: Status snapshot, then the user leaves
    let snapshot = registry.snapshot().await;
    println!(
        "6. Registry snapshot:\n{}\n",
        serde_json::to_string_pretty(&snapshot).unwrap()
    );

    registry.unregister("demo-room").await;
    println!("Done ({} sessions left).", registry.active_count().await);
}
