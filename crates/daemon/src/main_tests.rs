// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::run;
use std::io::Write;
use std::path::PathBuf;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn bad_config_path_surfaces_as_a_configuration_error() {
    let err = run(PathBuf::from("/nonexistent/telewatchd-main-test.yaml"))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn invalid_config_surfaces_as_a_configuration_error() {
    let file = write_config(
        r#"
telegram:
  bot_token: "abc"
  chat_id: "123"
monitors: []
"#,
    );
    let err = run(file.path().to_path_buf()).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
