//! Embedded chat page

/// First display entry of every web session; never part of the history
pub const WELCOME_MESSAGE: &str = "👋 Hi! I'm your Email Bot assistant. I can help you with:

• **General questions** - Ask me anything!
• **Draft emails** - Say \"write an email\" and I'll help you compose it
• **Send emails** - Say \"send an email\" and I'll help you send it (if configured)

What would you like to do today?";

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Email Bot</title>
    <style>
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f0f2f5;
            color: #333;
            display: flex;
            height: 100vh;
        }
        aside {
            width: 300px;
            background: #fff;
            border-right: 1px solid #e0e0e0;
            padding: 20px;
            overflow-y: auto;
        }
        aside h2 { margin-top: 0; }
        aside h3 { margin-bottom: 8px; font-size: 1rem; }
        .status-box {
            padding: 8px 12px;
            border-radius: 6px;
            margin: 6px 0;
            font-size: 0.85rem;
        }
        .status-success { background: #e8f5e9; color: #2e7d32; }
        .status-warning { background: #fff8e1; color: #f57f17; }
        .status-error { background: #ffebee; color: #c62828; }
        .hint { font-size: 0.85rem; color: #555; margin: 4px 0 10px; }
        button {
            width: 100%;
            padding: 10px;
            border: 1px solid #ccc;
            border-radius: 6px;
            background: #fafafa;
            cursor: pointer;
            font-size: 0.95rem;
        }
        button:hover { background: #f0f0f0; }
        main { flex: 1; display: flex; flex-direction: column; min-width: 0; }
        .main-header { text-align: center; color: #2E86AB; margin: 20px 0 10px; }
        #banner {
            display: none;
            margin: 0 20px;
            padding: 12px 16px;
            border-radius: 6px;
            background: #ffebee;
            color: #c62828;
        }
        #messages { flex: 1; overflow-y: auto; padding: 10px 20px; }
        .row { display: flex; margin: 12px 0; }
        .row.user { justify-content: flex-end; }
        .row.assistant { justify-content: flex-start; }
        .bubble {
            padding: 12px 16px;
            max-width: 75%;
            white-space: pre-wrap;
            word-wrap: break-word;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
        }
        .user .bubble {
            background: linear-gradient(135deg, #DCF8C6 0%, #C8E6C9 100%);
            color: #2E7D32;
            border-radius: 18px 18px 4px 18px;
        }
        .assistant .bubble {
            background: #fff;
            border: 1px solid #e0e0e0;
            border-radius: 18px 18px 18px 4px;
        }
        .assistant .bubble.error { background: #FFEBEE; border-color: #FFCDD2; }
        .meta { font-size: 0.7rem; color: #888; margin-top: 6px; }
        #typing { display: none; padding: 0 20px; color: #666; font-size: 0.85rem; }
        form { display: flex; gap: 10px; padding: 16px 20px; background: #fff; border-top: 1px solid #e0e0e0; }
        #input {
            flex: 1;
            padding: 12px;
            border: 1px solid #ccc;
            border-radius: 20px;
            font-size: 1rem;
        }
        form button { width: auto; border-radius: 20px; padding: 0 20px; }
    </style>
</head>
<body>
    <aside>
        <h2>🤖 Email Bot</h2>

        <h3>🔧 Configuration</h3>
        <div id="credentials"></div>

        <h3>💾 Memory Status</h3>
        <div class="hint">Session ID: <code id="session-id">...</code></div>
        <div class="hint">Messages in memory: <span id="history-len">0</span></div>

        <h3>💡 How to use:</h3>
        <div class="hint"><b>For general chat:</b><br>Just ask any question!</div>
        <div class="hint"><b>To draft an email:</b><br>Say: "Write an email" or "Draft an email"</div>
        <div class="hint"><b>To send an email:</b><br>Say: "Send an email" or "Send email to..."</div>

        <button id="clear">🗑️ Clear Chat</button>
    </aside>
    <main>
        <h1 class="main-header">📧 Email Bot Assistant</h1>
        <div id="banner">🚨 OpenAI API Key is missing! Please add OPENAI_API_KEY to your .env file.</div>
        <div id="messages"></div>
        <div id="typing">Bot is typing...</div>
        <form id="chat">
            <input id="input" type="text" placeholder="Type your message here..." autocomplete="off">
            <button type="submit">Send</button>
        </form>
    </main>
    <script>
        const STORAGE_KEY = 'mailbot-session';
        let sessionId = null;
        let busy = false;

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }

        function appendEntry(entry) {
            const row = document.createElement('div');
            row.className = 'row ' + entry.role;
            const who = entry.role === 'user' ? 'You' : 'Bot';
            const cls = entry.is_error ? 'bubble error' : 'bubble';
            row.innerHTML = '<div class="' + cls + '">' + escapeHtml(entry.text) +
                '<div class="meta">' + who + '</div></div>';
            const messages = document.getElementById('messages');
            messages.appendChild(row);
            messages.scrollTop = messages.scrollHeight;
        }

        function render(view) {
            sessionId = view.session_id;
            localStorage.setItem(STORAGE_KEY, sessionId);
            document.getElementById('session-id').textContent = sessionId.slice(0, 8) + '...';
            document.getElementById('history-len').textContent = view.history_len;
            document.getElementById('messages').innerHTML = '';
            view.display.forEach(appendEntry);
        }

        async function createSession() {
            const res = await fetch('/api/sessions', { method: 'POST' });
            render(await res.json());
        }

        async function restoreSession() {
            const saved = localStorage.getItem(STORAGE_KEY);
            if (saved) {
                const res = await fetch('/api/sessions/' + encodeURIComponent(saved));
                if (res.ok) {
                    render(await res.json());
                    return;
                }
            }
            await createSession();
        }

        async function loadStatus() {
            const res = await fetch('/api/status');
            const status = await res.json();
            const labels = {
                OPENAI_API_KEY: ['OpenAI API Key', 'Connected', 'Missing', 'status-error'],
                EMAIL_ADDRESS: ['Email', null, 'Not configured', 'status-warning'],
                EMAIL_PASSWORD: ['Email Password', 'Set', 'Not set', 'status-warning'],
            };
            const box = document.getElementById('credentials');
            box.innerHTML = '';
            status.credentials.forEach(c => {
                const [label, ok, missing, missingClass] = labels[c.name] || [c.name, 'Set', 'Missing', 'status-warning'];
                const div = document.createElement('div');
                if (c.present) {
                    div.className = 'status-box status-success';
                    div.textContent = '✅ ' + label + ': ' + (ok || c.detail || 'Set');
                } else {
                    div.className = 'status-box ' + missingClass;
                    div.textContent = (missingClass === 'status-error' ? '❌ ' : '⚠️ ') + label + ': ' + missing;
                }
                box.appendChild(div);
            });
            if (!status.ready) {
                document.getElementById('banner').style.display = 'block';
                document.getElementById('input').disabled = true;
            }
        }

        document.getElementById('chat').addEventListener('submit', async (event) => {
            event.preventDefault();
            const input = document.getElementById('input');
            const message = input.value.trim();
            if (!message || busy || !sessionId) return;

            busy = true;
            input.value = '';
            appendEntry({ role: 'user', text: message, is_error: false });
            document.getElementById('typing').style.display = 'block';

            try {
                const res = await fetch('/api/sessions/' + encodeURIComponent(sessionId) + '/messages', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ message }),
                });
                const body = await res.json();
                if (res.ok) {
                    appendEntry({ role: 'assistant', text: body.reply, is_error: body.is_error });
                    document.getElementById('history-len').textContent = body.history_len;
                } else if (res.status === 404) {
                    await createSession();
                } else {
                    appendEntry({ role: 'assistant', text: '❌ ' + body.error, is_error: true });
                }
            } catch (err) {
                appendEntry({ role: 'assistant', text: '❌ ' + err, is_error: true });
            } finally {
                document.getElementById('typing').style.display = 'none';
                busy = false;
            }
        });

        document.getElementById('clear').addEventListener('click', async () => {
            if (!sessionId || busy) return;
            const res = await fetch('/api/sessions/' + encodeURIComponent(sessionId), { method: 'DELETE' });
            if (res.ok) {
                render(await res.json());
            } else {
                await createSession();
            }
        });

        loadStatus();
        restoreSession();
    </script>
</body>
</html>
"#;
