mod common;

mod approval;
mod assembler;
mod eligibility;
