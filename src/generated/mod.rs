pub mod sso {
    tonic::include_proto!("sso");
}
