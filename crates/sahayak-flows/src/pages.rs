//! Server-rendered feature pages.
//!
//! One page per feature, each with a single form and a single result
//! panel. Pages carry no query parameters; all state a page needs is the
//! process-wide theme and whatever the teacher types into the form.

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use crate::api::{render_page, AppState};
use crate::theme::ThemeMode;

/// Routes for the index and the seven feature pages.
pub(crate) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/reading-assessment", get(reading_assessment))
        .route("/local-content", get(local_content))
        .route("/worksheets", get(worksheets))
        .route("/visual-aid", get(visual_aid))
        .route("/knowledge-base", get(knowledge_base))
        .route("/lesson-planner", get(lesson_planner))
        .route("/teacher-report", get(teacher_report))
}

const STYLE: &str = r"
:root { --bg: #fdfcf8; --fg: #1f2421; --panel: #ffffff; --accent: #246b45; }
html[data-theme='dark'] { --bg: #161917; --fg: #e8e6df; --panel: #1f2421; --accent: #7fc8a9; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
header { display: flex; align-items: center; gap: 1rem; padding: 0.8rem 1.2rem; border-bottom: 1px solid var(--accent); }
header a { color: var(--accent); text-decoration: none; }
main { max-width: 46rem; margin: 1.5rem auto; padding: 0 1rem; }
form { background: var(--panel); padding: 1rem; border-radius: 8px; display: grid; gap: 0.7rem; }
label { display: grid; gap: 0.25rem; font-size: 0.9rem; }
input, textarea, select { font: inherit; padding: 0.4rem; }
button { font: inherit; padding: 0.45rem 1rem; background: var(--accent); color: var(--bg); border: none; border-radius: 4px; cursor: pointer; }
#result { white-space: pre-wrap; background: var(--panel); margin-top: 1rem; padding: 1rem; border-radius: 8px; min-height: 2rem; }
#result img { max-width: 100%; }
.error { color: #c0392b; }
";

/// Shared client-side plumbing: JSON posting, result rendering, and the
/// theme toggle (which round-trips through the server so the single
/// process-wide mode stays authoritative).
const SCRIPT: &str = r#"
async function postJson(url, payload) {
  const res = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(payload),
  });
  const body = await res.json().catch(() => ({ error: 'unexpected response' }));
  if (!res.ok) { throw new Error(body.error || ('request failed: ' + res.status)); }
  return body;
}

function showError(err) {
  const el = document.getElementById('result');
  el.innerHTML = '';
  const p = document.createElement('p');
  p.className = 'error';
  p.textContent = err.message || String(err);
  el.appendChild(p);
}

function showText(text) {
  const el = document.getElementById('result');
  el.textContent = text;
}

function readFileAsDataUri(file) {
  return new Promise((resolve, reject) => {
    const reader = new FileReader();
    reader.onload = () => resolve(reader.result);
    reader.onerror = () => reject(new Error('could not read file'));
    reader.readAsDataURL(file);
  });
}

async function toggleTheme() {
  const current = document.documentElement.getAttribute('data-theme');
  const next = current === 'dark' ? 'light' : 'dark';
  const res = await fetch('/api/theme', {
    method: 'PUT',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ theme: next }),
  });
  const body = await res.json();
  document.documentElement.setAttribute('data-theme', body.theme);
}
"#;

/// Audio capture for the reading assessment page. Mirrors the server-side
/// session phases: no permission, idle, recording, ready. A re-record
/// replaces the previous clip entirely.
const RECORDER_SCRIPT: &str = r#"
let recorder = null;
let chunks = [];
let startedAt = 0;
let clip = null;

async function startRecording() {
  let stream;
  try {
    stream = await navigator.mediaDevices.getUserMedia({ audio: true });
  } catch (err) {
    showError(new Error('microphone permission denied'));
    return;
  }
  chunks = [];
  clip = null;
  recorder = new MediaRecorder(stream);
  recorder.ondataavailable = (e) => chunks.push(e.data);
  recorder.onstop = async () => {
    const durationSeconds = (Date.now() - startedAt) / 1000;
    const blob = new Blob(chunks, { type: recorder.mimeType });
    const dataUri = await readFileAsDataUri(blob);
    clip = { dataUri, durationSeconds };
    stream.getTracks().forEach((t) => t.stop());
    document.getElementById('status').textContent =
      'Recording ready (' + durationSeconds.toFixed(1) + 's)';
  };
  recorder.start();
  startedAt = Date.now();
  document.getElementById('status').textContent = 'Recording...';
}

function stopRecording() {
  if (recorder && recorder.state === 'recording') { recorder.stop(); }
}

async function submitAssessment(event) {
  event.preventDefault();
  if (!clip) { showError(new Error('record the student first')); return; }
  try {
    const body = await postJson('/api/flows/reading-assessment', {
      passage: document.getElementById('passage').value,
      audioDataUri: clip.dataUri,
      durationSeconds: clip.durationSeconds,
    });
    showText(
      'Transcript: ' + body.transcript +
      '\nAccuracy: ' + body.accuracy + '%' +
      '\nWords per minute: ' + body.wordsPerMinute +
      '\n\n' + body.feedback
    );
  } catch (err) { showError(err); }
}
"#;

fn layout(theme: ThemeMode, title: &str, content: &str, extra_script: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\" data-theme=\"{theme}\">\n<head>\n\
         <meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} - Sahayak</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <header>\n<a href=\"/\"><strong>Sahayak</strong></a>\n<span>{title}</span>\n\
         <button style=\"margin-left:auto\" onclick=\"toggleTheme()\">Toggle theme</button>\n</header>\n\
         <main>\n{content}\n<div id=\"result\"></div>\n</main>\n\
         <script>{SCRIPT}</script>\n<script>{extra_script}</script>\n</body>\n</html>\n"
    )
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Home",
            r#"<h1>Sahayak teaching assistant</h1>
<ul>
  <li><a href="/reading-assessment">Reading assessment</a> - record a student and get transcript, accuracy, and pace</li>
  <li><a href="/local-content">Local content</a> - stories, explanations, and worksheets in your language</li>
  <li><a href="/worksheets">Differentiated worksheets</a> - one textbook photo, one worksheet per grade</li>
  <li><a href="/visual-aid">Visual aids</a> - simple line drawings from a description</li>
  <li><a href="/knowledge-base">Knowledge base</a> - answers with analogies you can reuse in class</li>
  <li><a href="/lesson-planner">Lesson planner</a> - a lesson plan plus a matching game</li>
  <li><a href="/teacher-report">Teacher report</a> - grade a class list and download the PDF</li>
</ul>"#,
            "",
        )
    })
    .await
}

async fn reading_assessment(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Reading assessment",
            r#"<form onsubmit="submitAssessment(event)">
  <label>Passage the student should read
    <textarea id="passage" rows="4" required></textarea>
  </label>
  <div>
    <button type="button" onclick="startRecording()">Record</button>
    <button type="button" onclick="stopRecording()">Stop</button>
    <span id="status">Not recording</span>
  </div>
  <button type="submit">Assess reading</button>
</form>"#,
            RECORDER_SCRIPT,
        )
    })
    .await
}

async fn local_content(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Local content",
            r#"<form onsubmit="submitLocalContent(event)">
  <label>Content type
    <select id="contentType">
      <option value="story">Story</option>
      <option value="explanation">Explanation</option>
      <option value="worksheet">Worksheet</option>
    </select>
  </label>
  <label>Topic <input id="topic" required></label>
  <label>Language <input id="language" required></label>
  <label>Grade level <input id="gradeLevel" type="number" min="1" value="3"></label>
  <button type="submit">Generate</button>
</form>"#,
            r"
async function submitLocalContent(event) {
  event.preventDefault();
  try {
    const body = await postJson('/api/flows/local-content', {
      contentType: document.getElementById('contentType').value,
      topic: document.getElementById('topic').value,
      language: document.getElementById('language').value,
      gradeLevel: Number(document.getElementById('gradeLevel').value),
    });
    showText(body.content);
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}

async fn worksheets(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Differentiated worksheets",
            r#"<form onsubmit="submitWorksheets(event)">
  <label>Textbook page photo <input id="photo" type="file" accept="image/*" required></label>
  <label>Grade levels (comma separated) <input id="gradeLevels" placeholder="3, 5" required></label>
  <button type="submit">Generate worksheets</button>
</form>"#,
            r"
async function submitWorksheets(event) {
  event.preventDefault();
  try {
    const file = document.getElementById('photo').files[0];
    const photoDataUri = await readFileAsDataUri(file);
    const body = await postJson('/api/flows/worksheets', {
      photoDataUri,
      gradeLevels: document.getElementById('gradeLevels').value,
    });
    showText(
      Object.entries(body.worksheets)
        .map(([grade, sheet]) => grade + ':\n' + sheet)
        .join('\n\n')
    );
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}

async fn visual_aid(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Visual aids",
            r#"<form onsubmit="submitVisualAid(event)">
  <label>Describe the drawing <textarea id="prompt" rows="3" required></textarea></label>
  <button type="submit">Generate image</button>
</form>"#,
            r"
async function submitVisualAid(event) {
  event.preventDefault();
  try {
    const body = await postJson('/api/flows/visual-aid', {
      prompt: document.getElementById('prompt').value,
    });
    const el = document.getElementById('result');
    el.innerHTML = '';
    const img = document.createElement('img');
    img.src = body.imageUrl;
    el.appendChild(img);
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}

async fn knowledge_base(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Knowledge base",
            r#"<form onsubmit="submitQuestion(event)">
  <label>Your question <textarea id="question" rows="3" required></textarea></label>
  <button type="submit">Ask</button>
</form>"#,
            r"
async function submitQuestion(event) {
  event.preventDefault();
  try {
    const body = await postJson('/api/flows/knowledge-base', {
      question: document.getElementById('question').value,
    });
    showText(body.answer);
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}

async fn lesson_planner(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Lesson planner",
            r#"<form onsubmit="submitLessonPlan(event)">
  <label>Topic <input id="topic" required></label>
  <label>Grade level <input id="gradeLevel" required></label>
  <label>Learning objectives <textarea id="learningObjectives" rows="2" required></textarea></label>
  <label>Game type <input id="gameType" placeholder="quiz, puzzle, simulation" required></label>
  <button type="submit">Plan lesson</button>
</form>"#,
            r"
async function submitLessonPlan(event) {
  event.preventDefault();
  try {
    const body = await postJson('/api/flows/lesson-plan', {
      topic: document.getElementById('topic').value,
      gradeLevel: document.getElementById('gradeLevel').value,
      learningObjectives: document.getElementById('learningObjectives').value,
      gameType: document.getElementById('gameType').value,
    });
    showText('Lesson plan:\n' + body.lessonPlan + '\n\nGame:\n' + body.gameDescription);
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}

async fn teacher_report(State(state): State<Arc<AppState>>) -> Html<String> {
    render_page(&state, |theme| {
        layout(
            theme,
            "Teacher report",
            r#"<form onsubmit="submitReport(event)">
  <label>Report title <input id="title" value="Teacher Report"></label>
  <label>One student per line, as "Name, Marks"
    <textarea id="rows" rows="6" placeholder="Asha, 92&#10;Vikram, 58" required></textarea>
  </label>
  <button type="submit">Download PDF</button>
</form>"#,
            r"
async function submitReport(event) {
  event.preventDefault();
  try {
    const rows = document.getElementById('rows').value
      .split('\n')
      .map((line) => line.trim())
      .filter((line) => line.length > 0)
      .map((line) => {
        const idx = line.lastIndexOf(',');
        return { name: line.slice(0, idx).trim(), marks: Number(line.slice(idx + 1).trim()) };
      });
    const res = await fetch('/api/report', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ title: document.getElementById('title').value, rows }),
    });
    if (!res.ok) {
      const body = await res.json();
      throw new Error(body.error || 'report failed');
    }
    const blob = await res.blob();
    const link = document.createElement('a');
    link.href = URL.createObjectURL(blob);
    link.download = 'teacher-report.pdf';
    link.click();
    showText('Report downloaded.');
  } catch (err) { showError(err); }
}",
        )
    })
    .await
}
