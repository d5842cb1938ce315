//! Voice endpoints. Uploads are accepted and discarded; transcription and
//! synthesis return fixed demo payloads in place of a real speech provider.

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

/// Content types accepted for transcription uploads.
const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/m4a",
    "audio/x-m4a",
    "audio/webm",
    "audio/ogg",
    "audio/flac",
];

#[derive(Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_voice() -> String {
    "alloy".into()
}

fn default_speed() -> f64 {
    1.0
}

/// POST /api/voice/transcribe
pub async fn transcribe_audio(
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mut received_audio = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid upload: {e}")))?
    {
        let is_audio_field = field.name() == Some("audio")
            || field
                .content_type()
                .map(|ct| AUDIO_CONTENT_TYPES.contains(&ct))
                .unwrap_or(false);

        // Drain the body either way; only an audio field counts.
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid upload: {e}")))?;

        if is_audio_field && !bytes.is_empty() {
            received_audio = true;
        }
    }

    if !received_audio {
        return Err((StatusCode::BAD_REQUEST, "no audio file provided".into()));
    }

    Ok(Json(serde_json::json!({
        "text": "This is a demo transcription. In production, this would use a real \
                 speech-to-text API.",
        "confidence": 0.95,
        "duration": 3.5,
    })))
}

/// POST /api/voice/synthesize
pub async fn synthesize_speech(
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if req.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "text must not be empty".into()));
    }

    Ok(Json(serde_json::json!({
        "message": "Speech synthesis completed",
        "audio_url": "/api/voice/audio/demo.mp3",
        "voice": req.voice,
        "speed": req.speed,
        // Rough duration estimate from text length.
        "duration": req.text.len() as f64 * 0.1,
    })))
}

/// GET /api/voice/voices
pub async fn list_voices() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "voices": [
            { "id": "alloy", "name": "Alloy", "gender": "neutral" },
            { "id": "echo", "name": "Echo", "gender": "male" },
            { "id": "fable", "name": "Fable", "gender": "female" },
            { "id": "onyx", "name": "Onyx", "gender": "male" },
            { "id": "nova", "name": "Nova", "gender": "female" },
            { "id": "shimmer", "name": "Shimmer", "gender": "female" },
        ],
    }))
}
