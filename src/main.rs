use app::App;
use clap::Parser as _;

mod app;
mod convert;
mod filter;
mod notebook;
mod outdir;
mod sheet;
mod tags;

fn main() -> Result<(), anyhow::Error> {
    let app = App::parse();
    app.exec()
}
