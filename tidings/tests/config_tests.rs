/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fs;

use tempfile::TempDir;

use tidings::prelude::*;
use tidings_test::prelude::*;

use crate::setup::*;

mod setup;

/// Values present in the file override defaults; everything else keeps its default.
#[tidings_test]
async fn test_config_file_overrides_defaults() -> anyhow::Result<()> {
    initialize_tracing();
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r"
        [limits]
        pool_growth_warning = 8

        [behavior]
        trace_dispatch = false
        ",
    )?;

    let config = TidingsConfig::load_from(&path);
    assert_eq!(config.limits.pool_growth_warning, 8);
    assert_eq!(config.limits.subscriber_capacity, 4);
    assert!(!config.behavior.trace_dispatch);
    assert!(config.behavior.log_handler_faults);
    assert_eq!(config.paths, PathsConfig::default());

    temp_dir.close()?;
    Ok(())
}

/// A malformed file is logged and replaced by the defaults.
#[tidings_test]
async fn test_malformed_config_falls_back_to_defaults() -> anyhow::Result<()> {
    initialize_tracing();
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[limits\npool_growth_warning = ")?;

    assert_eq!(TidingsConfig::load_from(&path), TidingsConfig::default());

    temp_dir.close()?;
    Ok(())
}

/// `load` finds `tidings/config.toml` under `XDG_CONFIG_HOME`.
#[tidings_test]
async fn test_xdg_directory_resolution() -> anyhow::Result<()> {
    initialize_tracing();
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().join("tidings");
    fs::create_dir_all(&config_dir)?;
    fs::write(
        config_dir.join("config.toml"),
        r"
        [limits]
        subscriber_capacity = 32
        ",
    )?;

    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    let config = TidingsConfig::load();
    std::env::remove_var("XDG_CONFIG_HOME");

    assert_eq!(config.limits.subscriber_capacity, 32);
    temp_dir.close()?;
    Ok(())
}

/// A bus built with an explicit configuration reports and uses it.
#[tidings_test]
async fn test_builder_applies_configuration() -> anyhow::Result<()> {
    initialize_tracing();
    let config = TidingsConfig::from_toml_str(
        r"
        [limits]
        pool_growth_warning = 2
        ",
    )?;
    let bus = Bus::builder().config(config.clone()).build()?;
    assert_eq!(bus.config(), &config);

    // Growth past the warning threshold is reported, never refused.
    let leased: Vec<_> = (0..5).map(|_| bus.message::<Ping>()).collect();
    assert_eq!(leased.len(), 5);
    assert_eq!(bus.pool_stats::<Ping>(), PoolStats { total: 5, idle: 0 });
    Ok(())
}

/// Building outside a runtime without a handle is an error, not a panic.
#[test]
fn test_builder_requires_a_runtime() {
    initialize_tracing();
    let result = Bus::builder().config(TidingsConfig::default()).build();
    assert!(result.is_err());
}

/// A bus can run its handlers on a runtime other than the caller's.
#[test]
fn test_builder_accepts_an_explicit_runtime() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = tokio::runtime::Runtime::new()?;
    let bus = Bus::builder()
        .runtime(runtime.handle().clone())
        .config(TidingsConfig::default())
        .build()?;

    let (tx, rx) = std::sync::mpsc::channel();
    bus.subscribe_fn(move |msg: &Message<Ping>| {
        let _ = tx.send(msg.payload().seq);
        Reply::ready()
    });
    bus.message_with(Ping { seq: 5 }).publish();

    assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(2))?, 5);
    Ok(())
}
