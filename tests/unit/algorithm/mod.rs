mod compositor;
mod executor;
mod relaxation;
