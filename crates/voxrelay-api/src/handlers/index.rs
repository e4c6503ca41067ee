use axum::response::Html;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Voxrelay</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: Arial, sans-serif;
            max-width: 500px;
            margin: 20px auto;
            padding: 20px;
        }
        .upload-form {
            border: 2px dashed #ccc;
            padding: 20px;
            text-align: center;
            border-radius: 8px;
        }
        input[type="file"] {
            margin: 10px 0;
        }
        input[type="submit"] {
            background: #4CAF50;
            color: white;
            padding: 10px 20px;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        p.hint {
            color: #666;
            font-size: 0.9em;
        }
    </style>
</head>
<body>
    <div class="upload-form">
        <h2>Upload audio or video for transcription</h2>
        <form action="/api/v0/transcriptions" method="post" enctype="multipart/form-data">
            <input type="file" name="file" accept="audio/*,video/*" required>
            <br>
            <input type="submit" value="Upload and transcribe">
        </form>
        <p class="hint">Audio: mp3, m4a, wav, ogg. Video: mp4, mov, avi, mkv (audio track is extracted).</p>
    </div>
</body>
</html>
"#;

/// Minimal upload form for manual use; the JSON API does the real work.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}
