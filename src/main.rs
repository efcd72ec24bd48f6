use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    paquera::cli::main()
}
