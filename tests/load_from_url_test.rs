use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use gconsole::compression::{compress_to_base64, encode_url_safe};
use gconsole::editor::CodeEditor;
use gconsole::loaders::CodeLoader;
use gconsole::share::share_url;
use gconsole::LoadError;

/// Loader that answers from memory and counts calls.
#[derive(Default)]
struct FakeLoader {
    calls: AtomicUsize,
    gist: Option<String>,
}

impl CodeLoader for FakeLoader {
    fn load_gist<'a>(&'a self, gist_id: &'a str) -> BoxFuture<'a, Result<String, LoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.gist
                .clone()
                .ok_or_else(|| LoadError::Extract(format!("no gist {gist_id}")))
        })
    }

    fn load_github_file<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, LoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(format!("// from {path}")) })
    }

    fn load_code_from_question<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String, LoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(format!("// question {id}")) })
    }
}

#[tokio::test]
async fn inline_code_wins_over_remote_sources() {
    let loader = FakeLoader::default();
    let mut editor = CodeEditor::new();
    let query = format!("gist=abc&code={}", encode_url_safe("println 'inline'"));

    editor.load_from_url(&query, &loader).await.unwrap();

    assert_eq!(editor.get_code(), "println 'inline'");
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn codez_is_inflated() {
    let loader = FakeLoader::default();
    let mut editor = CodeEditor::new();
    let blob = compress_to_base64("def x = 1\nprintln x").unwrap();
    let query = format!("?codez={}", url::form_urlencoded::byte_serialize(blob.as_bytes()).collect::<String>());

    editor.load_from_url(&query, &loader).await.unwrap();
    assert_eq!(editor.get_code(), "def x = 1\nprintln x");
}

#[tokio::test]
async fn github_beats_stackoverflow() {
    let loader = FakeLoader::default();
    let mut editor = CodeEditor::new();
    editor.load_from_url("stackoverflow=1&github=a/b/main/c.groovy", &loader).await.unwrap();
    assert_eq!(editor.get_code(), "// from a/b/main/c.groovy");
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrecognized_query_leaves_content() {
    let loader = FakeLoader::default();
    let mut editor = CodeEditor::new();
    editor.set_code("untouched");

    let code = editor.load_from_url("foo=bar&lang=groovy", &loader).await.unwrap();

    assert_eq!(code, "");
    assert_eq!(editor.get_code(), "untouched");
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_result_leaves_content() {
    let loader = FakeLoader { gist: Some(String::new()), ..Default::default() };
    let mut editor = CodeEditor::new();
    editor.set_code("untouched");
    editor.load_from_url("gist=abc", &loader).await.unwrap();
    assert_eq!(editor.get_code(), "untouched");
}

#[tokio::test]
async fn loader_error_is_returned_and_content_kept() {
    let loader = FakeLoader::default();
    let mut editor = CodeEditor::new();
    editor.set_code("untouched");
    let err = editor.load_from_url("gist=abc", &loader).await.unwrap_err();
    assert!(matches!(err, LoadError::Extract(_)));
    assert_eq!(editor.get_code(), "untouched");
}

#[tokio::test]
async fn share_link_loads_back() {
    let code = "import groovy.json.*\nprintln new JsonBuilder([a: 'b & c']).toString()";
    let link = share_url("https://console.example/", code).unwrap();
    let query = url::Url::parse(&link).unwrap().query().unwrap().to_string();

    let mut editor = CodeEditor::new();
    editor.load_from_url(&query, &FakeLoader::default()).await.unwrap();
    assert_eq!(editor.get_code(), code);
}
