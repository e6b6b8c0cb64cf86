// 编译 authenticator.proto，同时生成服务端与客户端代码
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/authenticator.proto");

    // 使用内置 protoc，构建机器上无需预装
    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_with_config(config, &["proto/authenticator.proto"], &["proto"])?;

    Ok(())
}
