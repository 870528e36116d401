// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg(feature = "binary")]

use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn type_mode_with_options_passes() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([
            fixture("expected.json"),
            fixture("actual.json"),
            "--mode".to_string(),
            "type".to_string(),
            "--options".to_string(),
            fixture("options.json"),
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("matches"));
}

#[test]
fn exact_mode_reports_mismatches() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([fixture("expected.json"), fixture("actual.json")])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("3 mismatch(es)"))
        .stdout(predicate::str::contains("json atoms at path \"id\" are not equal"))
        .stdout(predicate::str::contains("tags[0]"));
}

#[test]
fn legacy_any_order_flag() {
    let args = [
        fixture("expected.json"),
        fixture("actual.json"),
        "--mode".to_string(),
        "type".to_string(),
        "--options".to_string(),
        fixture("legacy-options.json"),
    ];

    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args(&args)
        .assert()
        .code(4);

    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args(&args)
        .arg("--legacy-any-order")
        .assert()
        .code(0);
}

#[test]
fn assume_float_compares_numbers_as_floats() {
    let dir = std::env::temp_dir().join(format!("flex-assert-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let expected = dir.join("int.json");
    let actual = dir.join("float.json");
    std::fs::write(&expected, "[1, 2]").unwrap();
    std::fs::write(&actual, "[1.0, 2.0]").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .arg(&expected)
        .arg(&actual)
        .assert()
        .code(4);

    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .arg(&expected)
        .arg(&actual)
        .arg("--assume-float")
        .assert()
        .code(0);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unreadable_input_is_an_input_error() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([fixture("expected.json"), fixture("missing.json")])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("failed to read"));

    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([fixture("broken.json"), fixture("actual.json")])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("failed to decode json"));
}

#[test]
fn invalid_options_file_is_rejected() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([
            fixture("expected.json"),
            fixture("actual.json"),
            "--options".to_string(),
            fixture("broken.json"),
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("invalid options"));
}

#[test]
fn malformed_option_path_is_rejected() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([
            fixture("expected.json"),
            fixture("actual.json"),
            "--options".to_string(),
            fixture("malformed-path-options.json"),
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("invalid path `user[x].token`"));
}

#[test]
fn unknown_mode_is_rejected() {
    assert_cmd::cargo::cargo_bin_cmd!("flex-assert")
        .args([fixture("expected.json"), fixture("actual.json")])
        .args(["--mode", "fuzzy"])
        .assert()
        .code(2);
}
