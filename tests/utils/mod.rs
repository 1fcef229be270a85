#![allow(dead_code)]

pub mod factories;
