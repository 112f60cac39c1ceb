pub mod okcoin;
