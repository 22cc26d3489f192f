use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    ragchat::cli::main()
}
