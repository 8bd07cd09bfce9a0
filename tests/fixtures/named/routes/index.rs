// Registers my-foo, my-bar and the-bar.
