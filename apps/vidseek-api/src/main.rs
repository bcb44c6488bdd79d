use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vidseek_api::Args::parse();

	vidseek_api::run(args).await
}
