// Build script to compile GLSL shaders to SPIR-V

use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    // Compile shaders using glslc (part of Vulkan SDK)
    compile_shader("shaders/simple.vert", "shaders/simple.vert.spv");
    compile_shader("shaders/simple.frag", "shaders/simple.frag.spv");
}

fn compile_shader(input: &str, output: &str) {
    let input_path = Path::new(input);
    let output_path = Path::new(output);

    let result = Command::new("glslc")
        .arg(input_path)
        .arg("-o")
        .arg(output_path)
        .status();

    // Missing glslc is not a build error: the binary loads pre-built .spv
    // blobs at runtime, so only running the renderer needs them.
    match result {
        Ok(status) if status.success() => {
            println!("Compiled {} -> {}", input, output);
        }
        Ok(status) => {
            println!(
                "cargo:warning=glslc failed for {} (exit code {:?})",
                input,
                status.code()
            );
        }
        Err(e) => {
            println!(
                "cargo:warning=glslc not found ({}); compile manually: glslc {} -o {}",
                e, input, output
            );
        }
    }
}
