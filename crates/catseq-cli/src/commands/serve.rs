pub fn run(host: &str, port: u16, calibrated: bool) {
    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    rt.block_on(catseq_server::run_server(host, port, calibrated));
}
