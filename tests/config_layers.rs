//! Configuration and patch input, loaded the way the CLI loads them.

use serial_test::serial;

use diffthread::config::Config;
use diffthread::env::Env;
use diffthread::models::PatchLineKind;
use diffthread::patch;

#[test]
fn repo_file_then_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".diffthread.toml"),
        "[github]\napi_url = \"https://ghe.example.com/api/v3\"\n\n\
         [render]\nfont_size_px = 18\nbridge_scheme = \"thread\"\n\n\
         [network]\ntimeout_secs = 5\n",
    )
    .unwrap();

    let env = Env::mock([("DIFFTHREAD_FONT_SIZE", "20"), ("GITHUB_TOKEN", "ghp_x")]);
    let config = Config::load(Some(dir.path()), &env).unwrap();

    assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
    assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
    assert_eq!(config.render.font_size_px, 20);
    assert_eq!(config.render.bridge_scheme, "thread");
    assert_eq!(config.network.timeout().as_secs(), 5);
}

#[test]
fn broken_repo_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".diffthread.toml"), "[render\n").unwrap();
    let env = Env::mock(Vec::<(String, String)>::new());
    let err = Config::load(Some(dir.path()), &env).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
#[serial]
fn real_environment_is_read() {
    // SAFETY: serialized with other tests touching the process environment.
    unsafe { std::env::set_var("DIFFTHREAD_API_URL", "http://localhost:9999") };
    let config = Config::load(None, &Env::real()).unwrap();
    unsafe { std::env::remove_var("DIFFTHREAD_API_URL") };

    assert_eq!(config.github.api_url, "http://localhost:9999");
}

#[tokio::test]
async fn patch_file_with_crlf_and_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("handler.patch");
    std::fs::write(&path, "@@ -1,2 +1,2 @@\r\n-old\r\n+new\r\n same\r\n").unwrap();

    let text = patch::read_patch_file(&path).await.unwrap();
    let lines = patch::parse(&text);

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1].raw_text, "-old");
    assert_eq!(lines[2].kind, PatchLineKind::Addition);
    assert_eq!(lines[3].new_line_number, Some(2));
    // The segment after the final newline is an empty context line.
    assert_eq!(lines[4].raw_text, "");
    assert_eq!(lines[4].position, 4);
}

#[tokio::test]
async fn missing_patch_file() {
    let err = patch::read_patch_file(std::path::Path::new("/nonexistent/x.patch"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("patch file not found"));
}
