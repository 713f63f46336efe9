use std::path::PathBuf;
use std::process;

use clap::Parser;

use reed::interpreter::Environment;
use reed::lexer::Token;
use reed::parser::{parse, ParseState};

#[derive(Parser)]
#[command(name = "reed")]
struct Cli {
    /// Source file to interpret
    file: Option<PathBuf>,

    /// Interpret an inline expression instead of a file
    #[arg(long)]
    expr: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let syntax = match (&cli.file, &cli.expr) {
        (_, Some(expr)) => {
            let tokens = Token::lex(expr)?;
            let mut state = ParseState::new(tokens);
            match parse(&mut state) {
                Ok(syntax) => syntax,
                Err(error) => {
                    eprintln!("{error}");
                    process::exit(1);
                }
            }
        }
        (Some(file), None) => match reed::import::load(file) {
            Ok(syntax) => syntax,
            Err(error) => {
                eprintln!("{error}");
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("nothing to interpret: pass a file or --expr");
            process::exit(2);
        }
    };

    let ty = match reed::type_of(&syntax) {
        Ok(ty) => ty,
        Err(error) => {
            eprintln!("{error}");
            process::exit(1);
        }
    };
    let value = reed::evaluate(&Environment::new(), &syntax);

    println!("{} : {}", value, ty);
    Ok(())
}
