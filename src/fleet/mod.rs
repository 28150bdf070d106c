pub mod arrears;
