use std::env;
use std::path::PathBuf;

fn main() {
	println!("cargo:rerun-if-changed=cpp/shim.h");
	println!("cargo:rerun-if-changed=cpp/shim.cpp");

	let seal = cmake::Config::new("cpp")
		.define("SEAL_USE_INTRIN", "ON")
		.define("CMAKE_BUILD_TYPE", "Release")
		.build();

	println!("cargo:rustc-link-search=native={}/lib", seal.display());
	println!("cargo:rustc-link-search=native={}/lib64", seal.display());
	println!("cargo:rustc-link-lib=static=sealshim");
	println!("cargo:rustc-link-lib=static=seal-4.1");

	let bindings = bindgen::Builder::default()
		.header("cpp/shim.h")
		.clang_arg(format!("-I{}/include", seal.display()))
		.clang_arg("-x")
		.clang_arg("c++")
		.clang_arg("-std=c++17")
		.allowlist_function("(EncParams|SEALContext|Plaintext|Ciphertext|Modulus|CoeffModulus|PlainModulus|KeyGenerator|PublicKey|SecretKey|RelinKeys|GaloisKeys|Encryptor|Decryptor|Evaluator|BatchEncoder|MemoryPoolHandle|PolyArray)_.*")
		.allowlist_type("(SchemeType|SecurityLevel|CompressionType)")
		.parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
		.generate()
		.expect("unable to generate SEAL shim bindings");

	let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
	bindings
		.write_to_file(out_path.join("bindings.rs"))
		.expect("unable to write bindings.rs");
}
