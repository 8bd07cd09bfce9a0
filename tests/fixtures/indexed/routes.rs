// Alternate index module, loaded by explicit path.
