use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Wallet service CLI - run the balance accrual and inspect wallets")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the balance accrual once, right now
    ///
    /// Recomputes totalwithdrawable for every wallet in a single database
    /// transaction, exactly as the daily scheduled run does.
    RunAccrual,

    /// Print when the next scheduled accrual will run
    NextAccrual(NextAccrualArgs),

    /// Print a stored wallet as JSON
    ShowWallet(ShowWalletArgs),
}

#[derive(ClapArgs, Debug)]
pub struct NextAccrualArgs {
    /// IANA time zone whose midnight triggers the accrual
    #[arg(short, long, default_value = "UTC", help = "IANA time zone, e.g. Europe/Berlin")]
    pub timezone: String,
}

#[derive(ClapArgs, Debug)]
pub struct ShowWalletArgs {
    /// Wallet address to look up
    #[arg(short, long, help = "Wallet address to look up")]
    pub address: String,
}
