use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // システムに protoc が無くてもビルドできるようにする
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .protoc_arg("--experimental_allow_proto3_optional")
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/sso.proto"], &["proto"])?;
    Ok(())
}
