pub mod cpu;
pub mod disk;
pub mod load;
pub mod procs;
