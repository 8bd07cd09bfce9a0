// Collides with users/index.rs.
