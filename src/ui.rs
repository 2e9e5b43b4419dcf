use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Multimodal AI Agent - Media Summarizer</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            padding: 30px 20px;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 1000px;
            margin: 0 auto;
            padding: 40px;
        }

        h1 {
            color: #333;
            margin-bottom: 10px;
            font-size: 2em;
        }

        .subtitle {
            color: #666;
            margin-bottom: 30px;
            font-size: 0.9em;
        }

        .tabs {
            display: flex;
            gap: 8px;
            border-bottom: 2px solid #f0f0f0;
            margin-bottom: 25px;
        }

        .tab {
            background: none;
            border: none;
            padding: 12px 20px;
            font-size: 1em;
            font-weight: 600;
            color: #999;
            cursor: pointer;
            border-bottom: 3px solid transparent;
        }

        .tab.active {
            color: #667eea;
            border-bottom-color: #667eea;
        }

        .panel {
            display: none;
        }

        .panel.active {
            display: block;
        }

        label {
            display: block;
            color: #333;
            font-weight: 600;
            margin: 18px 0 8px;
        }

        input[type="text"], textarea {
            width: 100%;
            border: 2px solid #e0e0e0;
            border-radius: 10px;
            padding: 12px;
            font-family: inherit;
            font-size: 0.95em;
        }

        textarea {
            height: 100px;
            resize: vertical;
        }

        .preview {
            max-width: 100%;
            max-height: 360px;
            border-radius: 10px;
            margin-top: 15px;
            display: none;
        }

        button.action {
            margin-top: 20px;
            background: #667eea;
            color: white;
            border: none;
            border-radius: 25px;
            padding: 12px 28px;
            font-size: 1em;
            font-weight: 600;
            cursor: pointer;
        }

        button.action:disabled {
            background: #aab4f0;
            cursor: wait;
        }

        .info, .warning, .error {
            padding: 15px;
            border-radius: 10px;
            margin-top: 20px;
        }

        .info {
            background: #eef3ff;
            color: #4457a8;
        }

        .warning {
            background: #fff8e1;
            border: 2px solid #ffe08a;
            color: #8a6d00;
            display: none;
        }

        .error {
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            display: none;
        }

        .result {
            background: #f8f9ff;
            border-radius: 10px;
            padding: 20px;
            margin-top: 20px;
            display: none;
        }

        .result-label {
            color: #667eea;
            font-weight: 600;
            margin-bottom: 10px;
            font-size: 0.9em;
            text-transform: uppercase;
            letter-spacing: 1px;
        }

        .result-text {
            color: #333;
            line-height: 1.6;
            white-space: pre-wrap;
        }

        .meta-info {
            display: flex;
            justify-content: space-between;
            margin-top: 15px;
            padding-top: 15px;
            border-top: 1px solid #e0e0e0;
            font-size: 0.85em;
            color: #666;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>🎥🖼️ Media AI Summarizer Agent</h1>
        <p class="subtitle" id="subtitle">Powered by Google Gemini</p>

        <div class="tabs">
            <button class="tab active" data-panel="video">🎥 Video Analysis</button>
            <button class="tab" data-panel="image">🖼️ Image Analysis</button>
            <button class="tab" data-panel="text">📝 Text Summarization</button>
        </div>

        <form class="panel active" id="video" data-endpoint="/api/video">
            <label for="videoFile">Upload a video file</label>
            <input type="file" id="videoFile" name="file" accept=".mp4,.mov,.avi">
            <video class="preview" controls></video>
            <label for="videoQuery">What insights are you seeking from the video?</label>
            <textarea id="videoQuery" name="query" placeholder="Ask anything about the video content. The AI agent will analyze and gather additional context if needed."></textarea>
            <button class="action" type="submit">🔍 Analyze Video</button>
            <div class="info">Upload a video file to begin analysis.</div>
        </form>

        <form class="panel" id="image" data-endpoint="/api/image">
            <label for="imageFile">Upload an image file</label>
            <input type="file" id="imageFile" name="file" accept=".jpg,.jpeg,.png">
            <img class="preview" alt="Uploaded Image">
            <label for="imageQuery">What insights are you seeking from the image?</label>
            <textarea id="imageQuery" name="query" placeholder="Ask anything about the image content. The AI agent will analyze and provide insights."></textarea>
            <button class="action" type="submit">🔍 Analyze Image</button>
            <div class="info">Upload an image file to begin analysis.</div>
        </form>

        <form class="panel" id="text" data-endpoint="/api/text">
            <label for="textInput">Enter your text for summarization:</label>
            <textarea id="textInput" name="text" placeholder="Type or paste text here..."></textarea>
            <label for="textFile">Or upload a text file:</label>
            <input type="file" id="textFile" name="file" accept=".txt">
            <label for="instructions">Customize your summarization prompt:</label>
            <input type="text" id="instructions" name="instructions" placeholder="For example: Summarize with key highlights, or provide bullet points.">
            <button class="action" type="submit">🔍 Summarize Text</button>
        </form>

        <div class="warning" id="warning"></div>
        <div class="error" id="error"></div>

        <div class="result" id="result">
            <div class="result-label" id="resultLabel">Analysis Result</div>
            <div class="result-text" id="resultText"></div>
            <div class="meta-info">
                <span>Model: <strong id="modelName">--</strong></span>
                <span>Processing: <strong id="processingTime">--</strong>ms</span>
            </div>
        </div>
    </div>

    <script>
        const warningDiv = document.getElementById('warning');
        const errorDiv = document.getElementById('error');
        const resultDiv = document.getElementById('result');

        function reset() {
            warningDiv.style.display = 'none';
            errorDiv.style.display = 'none';
            resultDiv.style.display = 'none';
        }

        document.querySelectorAll('.tab').forEach((tab) => {
            tab.addEventListener('click', () => {
                document.querySelectorAll('.tab').forEach((t) => t.classList.remove('active'));
                document.querySelectorAll('.panel').forEach((p) => p.classList.remove('active'));
                tab.classList.add('active');
                document.getElementById(tab.dataset.panel).classList.add('active');
                reset();
            });
        });

        document.querySelectorAll('form.panel').forEach((form) => {
            const fileInput = form.querySelector('input[type="file"]');
            const preview = form.querySelector('.preview');
            const info = form.querySelector('.info');

            fileInput.addEventListener('change', () => {
                const file = fileInput.files[0];
                if (info) {
                    info.style.display = file ? 'none' : 'block';
                }
                if (preview) {
                    preview.style.display = file ? 'block' : 'none';
                    if (file) {
                        preview.src = URL.createObjectURL(file);
                    }
                }
            });

            form.addEventListener('submit', async (e) => {
                e.preventDefault();
                reset();
                const button = form.querySelector('button.action');
                const label = button.textContent;
                button.disabled = true;
                button.textContent = form.id === 'text' ? 'Summarizing text...' : 'Processing and gathering insights...';

                try {
                    const response = await fetch(form.dataset.endpoint, {
                        method: 'POST',
                        body: new FormData(form)
                    });
                    const body = await response.json();

                    if (!response.ok) {
                        const target = body.kind === 'warning' ? warningDiv : errorDiv;
                        target.textContent = body.message;
                        target.style.display = 'block';
                        return;
                    }

                    document.getElementById('resultLabel').textContent = body.title;
                    document.getElementById('resultText').textContent = body.content;
                    document.getElementById('modelName').textContent = body.model;
                    document.getElementById('processingTime').textContent = body.processing_time_ms;
                    resultDiv.style.display = 'block';
                } catch (error) {
                    errorDiv.textContent = 'Error: ' + error.message;
                    errorDiv.style.display = 'block';
                } finally {
                    button.disabled = false;
                    button.textContent = label;
                }
            });
        });

        fetch('/health')
            .then((r) => r.json())
            .then((h) => {
                document.getElementById('subtitle').textContent = 'Powered by Google Gemini • ' + h.model;
            })
            .catch(() => {});
    </script>
</body>
</html>
        "#,
    )
}
