mod open;
mod profiles;
