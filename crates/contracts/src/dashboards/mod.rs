pub mod d100_security_overview;
