use tracing_subscriber::EnvFilter;

use crate::config::Env;

fn default_filter(env: Env) -> EnvFilter {
    // RUST_LOG があればそちらを優先する
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match env {
        Env::Local | Env::Dev => EnvFilter::new("debug"),
        Env::Prod => EnvFilter::new("info"),
    })
}

/// 実行環境に応じたサブスクライバを登録する
///
/// local は人間向けのテキスト、dev/prod は JSON 出力。
pub fn init(env: Env) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(default_filter(env))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match env {
        Env::Local => builder.init(),
        Env::Dev | Env::Prod => builder.json().init(),
    }
}
