fn main() -> Result<(), Box<dyn std::error::Error>> {
	println!("Compiling proto files...");

	tonic_build::configure()
		.build_client(true)
		.build_server(true)
		.compile(&["proto/pantheon/pir.proto"], &["proto/pantheon"])?;

	Ok(())
}
